/*!
 * Etherscanner Core
 *
 * Tipos, codecs e traits compartilhados para a workspace Etherscanner
 */

pub mod types;
pub mod traits;
pub mod codec;
pub mod error;

// Re-exportações públicas
pub use codec::{AddressCodec, AddressLike, AmountCodec, HexAmount};
pub use error::Error;
pub use types::*;
