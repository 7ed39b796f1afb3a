use alloy::sol;

sol!(
    #[allow(missing_docs)]
    interface AxieContract {
        function safeTransferFrom(address from, address to, uint256 tokenId) external;
    }
);
