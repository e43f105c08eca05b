//! Operation pipelines: lead submission, user lookup, attribute listing

pub mod attribute_lister;
pub mod gateway;
pub mod lead_submitter;
pub mod user_fetcher;

pub use attribute_lister::{AttributeLister, AttributeListing};
pub use gateway::LeadGateway;
pub use lead_submitter::{LeadStage, LeadSubmission, LeadSubmitter};
pub use user_fetcher::{FetchedUser, UserFetcher};
