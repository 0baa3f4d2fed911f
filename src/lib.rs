pub mod classpath;
pub mod cli;
pub mod config;
pub mod error;
pub mod inject;
pub mod smali;
pub mod workflow;

pub use config::Config;
pub use error::{InjectError, Result};
pub use inject::{FallbackLevel, InjectionOutcome, Injector};
pub use workflow::{run_inject_workflow, run_locate};
