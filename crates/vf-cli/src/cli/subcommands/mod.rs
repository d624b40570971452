mod candidate;
mod fact;
mod registry;
mod session;

pub use candidate::CandidateCommands;
pub use fact::FactCommands;
pub use registry::RegistryCommands;
pub use session::SessionCommands;
