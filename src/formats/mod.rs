/// EFI signature list (ESL) parser
pub mod esl;
