pub mod assembler;
pub mod knowledge_base;
pub mod risk;
pub mod service;
