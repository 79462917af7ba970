//! Pegged token contract bindings.

use alloy_sol_types::sol;

sol! {
    /// Pegged token with a whitelist-gated swap, an owner-set rate and a transfer tax.
    #[sol(rpc)]
    interface IPeggedToken {
        /// Emitted when tokens are transferred
        event Transfer(
            address indexed from,
            address indexed to,
            uint256 value
        );

        /// Emitted when an allowance is set
        event Approval(
            address indexed owner,
            address indexed spender,
            uint256 value
        );

        /// Swap rate between the native currency and the token (18 decimals)
        function rate() external view returns (uint256);

        /// Transfer tax
        function tax() external view returns (uint256);

        /// Address receiving the transfer tax
        function taxReceiver() external view returns (address);

        /// Contract owner
        function owner() external view returns (address);

        /// Whether an account may use the swap functions
        function isWhitelist(address account) external view returns (bool);

        /// Whether an account holds admin rights
        function isAdmin(address account) external view returns (bool);

        /// Get token balance of an account
        function balanceOf(address account) external view returns (uint256);

        /// Get token decimals
        function decimals() external view returns (uint8);

        /// Mint tokens to the caller
        function mint(uint256 amount) external;

        /// Burn tokens from the caller
        function burn(uint256 amount) external;

        /// Approve spender to spend tokens
        function approve(address spender, uint256 amount) external returns (bool);

        /// Send the same amount to every recipient
        function airdrop(address[] calldata recipients, uint256 amount) external;

        /// Add or remove an account from the whitelist
        function setWhiteList(address account, bool status) external;

        /// Grant or revoke admin rights
        function setAdmin(address account, bool status) external;

        /// Set the transfer tax
        function setTax(uint256 tax) external;

        /// Set the tax receiver
        function setTaxReceiver(address receiver) external;

        /// Set the swap rate
        function setRate(uint256 rate) external;

        /// Swap the attached native value for tokens at the current rate
        function getToken() external payable;

        /// Swap tokens back to the native currency at the current rate
        function getEth(uint256 amount) external;
    }
}
