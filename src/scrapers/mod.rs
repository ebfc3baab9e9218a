pub mod understat;
