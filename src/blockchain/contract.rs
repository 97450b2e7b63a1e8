// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! ABI binding for the on-chain record registry.
//!
//! The contract keeps the historical `BusinessData` naming for its entries;
//! each entry is one confidential sensor record.

use alloy::sol;

sol! {
    #[sol(rpc)]
    interface ISensorRegistry {
        function getAllBusinessIds() external view returns (string[] memory);

        function getBusinessData(string calldata businessId)
            external
            view
            returns (
                string memory name,
                uint256 publicValue1,
                uint256 publicValue2,
                string memory description,
                address creator,
                uint256 timestamp,
                uint32 decryptedValue,
                bool isVerified
            );

        function getEncryptedValue(string calldata businessId) external view returns (bytes32);

        function createBusinessData(
            string calldata businessId,
            string calldata name,
            bytes32 encryptedValue,
            bytes calldata inputProof,
            uint256 publicValue1,
            uint256 publicValue2,
            string calldata description
        ) external;

        function verifyDecryption(
            string calldata businessId,
            bytes memory abiEncodedClearValue,
            bytes memory decryptionProof
        ) external;

        function isAvailable() external view returns (bool);
    }
}
