pub mod payment;
pub mod supabase;
pub mod traits;
pub mod types;

pub use payment::EdgeFunctionPayments;
pub use supabase::SupabaseClient;
pub use traits::{Geocoder, ManualCoordinates, MarketplaceBackend, PaymentConfirmer, PaymentGateway};
pub use types::{PaymentIntent, PaymentRequest, Session};
