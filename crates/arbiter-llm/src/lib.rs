pub mod groq;
