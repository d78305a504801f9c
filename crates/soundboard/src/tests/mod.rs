mod controller;
mod key_registry;
