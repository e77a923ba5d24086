// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Contract addresses of the receiver's collaborators
//!
//! Only chains where USDC, a Uniswap V2 router, Lido and CCTP are all
//! deployed are listed.

use alloy_primitives::{address, Address};

// Ethereum mainnet

/// <https://etherscan.io/address/0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48>
pub const ETHEREUM_USDC: Address = address!("A0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48");

/// <https://etherscan.io/address/0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2>
pub const ETHEREUM_WETH: Address = address!("C02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2");

/// <https://docs.uniswap.org/contracts/v2/reference/smart-contracts/v2-deployments>
pub const ETHEREUM_UNISWAP_V2_ROUTER: Address =
    address!("7a250d5630B4cF539739dF2C5dAcb4c659F2488D");

/// <https://docs.lido.fi/deployed-contracts/>
pub const ETHEREUM_LIDO_STETH: Address = address!("ae7ab96520DE3A18E5e111B5EaAb095312D7fE84");

/// <https://etherscan.io/address/0x0a992d191DEeC32aFe36203Ad87D7d289a738F81>
pub const ETHEREUM_MESSAGE_TRANSMITTER: Address =
    address!("0a992d191DEeC32aFe36203Ad87D7d289a738F81");

// Ethereum Sepolia

/// <https://developers.circle.com/stablecoins/usdc-contract-addresses>
pub const SEPOLIA_USDC: Address = address!("1c7D4B196Cb0C7B01d743Fbc6116a902379C7238");

/// <https://docs.uniswap.org/contracts/v2/reference/smart-contracts/v2-deployments>
pub const SEPOLIA_WETH: Address = address!("fFf9976782d46CC05630D1f6eBAb18b2324d6B14");

/// <https://docs.uniswap.org/contracts/v2/reference/smart-contracts/v2-deployments>
pub const SEPOLIA_UNISWAP_V2_ROUTER: Address =
    address!("eE567Fe1712Faf6149d80dA1E6934E354124CfE3");

/// <https://docs.lido.fi/deployed-contracts/sepolia>
pub const SEPOLIA_LIDO_STETH: Address = address!("3e3FE7dBc6B4C189E7128855dD526361c49b40Af");

/// <https://sepolia.etherscan.io/address/0x7865fAfC2db2093669d92c0F33AeEF291086BEFD>
pub const SEPOLIA_MESSAGE_TRANSMITTER: Address =
    address!("7865fAfC2db2093669d92c0F33AeEF291086BEFD");
