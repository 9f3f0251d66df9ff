pub mod abs_send_time_extension;
