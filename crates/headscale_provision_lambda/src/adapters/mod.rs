pub mod aws_clients;
pub mod callback;
pub mod http_callback;
pub mod inventory;
pub mod parameter_store;
pub mod zone_directory;
