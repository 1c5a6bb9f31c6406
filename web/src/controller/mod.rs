pub(crate) mod health_check_controller;
pub(crate) mod processing_controller;
pub(crate) mod topic_controller;
pub(crate) mod training_module_controller;
pub(crate) mod transcript_controller;
