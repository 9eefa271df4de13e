//! Application use cases. Orchestrate domain logic via ports.

pub mod export_service;
pub mod history_pager;
pub mod provisioner;
pub mod sender_resolver;

pub use export_service::ExportService;
pub use history_pager::HistoryPager;
pub use provisioner::SinkProvisioner;
pub use sender_resolver::SenderResolver;
