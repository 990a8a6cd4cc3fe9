pub mod command;
pub mod os_process;
