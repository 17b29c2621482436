pub mod design_api;
