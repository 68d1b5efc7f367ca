pub mod resource_server;
