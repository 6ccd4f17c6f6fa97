//! HTTP request handlers

pub mod audio;
pub mod chat;
pub mod health;
pub mod transcribe;
pub mod turn;
pub mod upload;
