//! Ledger client interfaces and implementations.
//!
//! Provides read access to ledger RPC endpoints for activity analysis:
//!
//! - The [`LedgerClient`] trait and its Solana and EVM clients
//! - JSON-RPC over HTTP transport with endpoint rotation
//! - Error handling for transport failures

mod clients;
mod error;
mod transports;

pub use clients::{EvmClient, LedgerClient, SolanaClient, TransactionHistory};
pub use error::TransportError;
pub use transports::{
	into_rpc_result, BlockchainTransport, EndpointManager, HttpTransportClient,
	RotatingTransport, TransientErrorRetryStrategy, ROTATE_ON_ERROR_CODES,
};
