//! Example documents written into an empty data directory

use std::path::Path;

use tracing::info;

/// (file name, contents) of the bundled example documents
pub const EXAMPLE_DOCUMENTS: [(&str, &str); 4] = [
    (
        "python.txt",
        "Python is a high-level interpreted programming language created by Guido van Rossum in 1991.
It is known for a design philosophy that emphasizes code readability through its notable use of whitespace.
Python supports multiple programming paradigms, including structured, object-oriented and functional programming.
It is widely used in data science, artificial intelligence, web development and automation.
",
    ),
    (
        "agents.txt",
        "AI agents are software systems that can perceive their environment, make decisions and act to achieve specific goals.
An agent uses language models (LLMs) as its \"brain\" to process information and make decisions.
Multiagent systems are systems where several specialized agents collaborate to solve complex tasks.
Each agent can have a specific role: information search, analysis, creativity, and so on.
The typical flow is: receive a request, plan, execute actions through tools, and deliver results.
",
    ),
    (
        "rag.txt",
        "RAG (Retrieval Augmented Generation) is a technique that combines information retrieval with text generation.
In a RAG system, when a query arrives, relevant documents or fragments are first searched for in a knowledge base.
Those fragments are then given as context to a language model to generate an informed answer.
RAG improves answer accuracy by providing specific, up-to-date information.
It also helps reduce \"hallucinations\", the generation of incorrect information by models.
",
    ),
    (
        "llms.txt",
        "Large Language Models (LLMs) are artificial intelligence models trained on huge amounts of text.
These models can generate text, translate languages, write different kinds of creative content and answer questions.
Popular examples include GPT, LLaMA, Mistral, Phi and Claude.
Local LLMs are models that run on your own computer or server, without a cloud connection.
Ollama is a tool that runs LLMs locally with minimal setup.
",
    ),
];

/// Create `dir` if needed and, only when it is empty, write the example documents.
///
/// Returns the number of files written.
pub fn seed_example_documents(dir: &Path) -> std::io::Result<usize> {
    std::fs::create_dir_all(dir)?;
    if std::fs::read_dir(dir)?.next().is_some() {
        return Ok(0);
    }

    println!("📄 Creating example documents...");
    for (name, contents) in EXAMPLE_DOCUMENTS {
        std::fs::write(dir.join(name), contents)?;
    }
    info!(dir = %dir.display(), files = EXAMPLE_DOCUMENTS.len(), "Seeded example documents");
    println!("✅ Example documents created");
    Ok(EXAMPLE_DOCUMENTS.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeds_empty_dir_once() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("data");

        assert_eq!(seed_example_documents(&data).unwrap(), 4);
        let mut names: Vec<String> = std::fs::read_dir(&data)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, vec!["agents.txt", "llms.txt", "python.txt", "rag.txt"]);

        assert_eq!(seed_example_documents(&data).unwrap(), 0);
        assert_eq!(std::fs::read_dir(&data).unwrap().count(), 4);
    }

    #[test]
    fn test_non_empty_dir_untouched() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("mine.txt"), "my notes").unwrap();
        assert_eq!(seed_example_documents(dir.path()).unwrap(), 0);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
