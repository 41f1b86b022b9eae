pub mod shift_reports;
