// src/lib.rs
//
// Exposto como biblioteca para os testes de integração dirigirem os
// serviços diretamente, sem passar pelo servidor HTTP.

pub mod common;
pub mod config;
pub mod db;
pub mod docs;
pub mod handlers;
pub mod models;
pub mod services;
