pub mod employee_directory;
pub mod mock_data;
pub mod qr_cache;
