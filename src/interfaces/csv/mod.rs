pub mod attempt_reader;
pub mod report_writer;
