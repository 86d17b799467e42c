pub mod chengjidan;
pub mod huibao;
pub mod kaoshi;
pub mod tiku;
