//! Prompt Building and Management
//!
//! Constructs the grounded-answer prompt for the tutoring persona and the
//! quiz-question prompt.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Persona and grounding instructions for answering student questions
const TUTOR_PERSONA: &str = "Seu nome é Lia. Você é uma assistente virtual de tutoria de sala de aula da Escola Adventista, criada para auxiliar alunos e professores.
Você foi desenvolvida em parceria entre o professor Edmar e o desenvolvedor de software Tarcio, sendo lançada em janeiro de 2025, atualmente na versão beta.
Seu objetivo é responder perguntas relacionadas ao contexto escolar em sala de aula, incluindo dúvidas sobre disciplinas de forma descontraída, clara e direta.

Use o seguinte contexto para responder a pergunta. Se não encontrar informações relevantes no contexto, seja honesto sobre isso.";

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// Chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Prompt builder
///
/// # Example
/// ```ignore
/// let messages = PromptBuilder::new()
///     .tutor_system_prompt(&["Oxidação é a perda de elétrons."], "")
///     .user_message("O que é oxidação?")
///     .build();
/// ```
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    messages: Vec<Message>,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// System turn for grounded answers
    ///
    /// Passages are joined by blank lines, in the order given.
    pub fn tutor_system_prompt<S: AsRef<str>>(
        mut self,
        passages: &[S],
        conversation_history: &str,
    ) -> Self {
        let context = passages
            .iter()
            .map(|p| p.as_ref())
            .collect::<Vec<_>>()
            .join("\n\n");

        let system = format!(
            "{TUTOR_PERSONA}\n\nContexto:\n{context}\n\nHistórico da conversa:\n{conversation_history}"
        );

        self.messages.push(Message::system(system));
        self
    }

    /// Single user turn asking for a multiple-choice question
    pub fn quiz_prompt<S: AsRef<str>>(
        mut self,
        topic: &str,
        context: &str,
        used_questions: &[S],
    ) -> Self {
        let used = used_questions
            .iter()
            .map(|q| format!("- {}", q.as_ref()))
            .collect::<Vec<_>>()
            .join("\n");
        let used = if used.is_empty() {
            "nenhuma".to_string()
        } else {
            format!("\n{used}")
        };

        let prompt = format!(
            "Baseado no contexto abaixo, crie uma pergunta sobre o tópico '{topic}' com 4 opções de resposta, \
indicando qual delas é a correta. O contexto é:

{context}

A pergunta deve seguir este formato:
Pergunta: ...
A) ...
B) ...
C) ...
D) ...
Resposta correta: ...

Não repita perguntas que já foram feitas. Perguntas já feitas: {used}"
        );

        self.messages.push(Message::user(prompt));
        self
    }

    pub fn user_message(mut self, content: impl Into<String>) -> Self {
        self.messages.push(Message::user(content));
        self
    }

    pub fn build(self) -> Vec<Message> {
        self.messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_display() {
        assert_eq!(Role::System.to_string(), "system");
        assert_eq!(Role::Assistant.to_string(), "assistant");
    }

    #[test]
    fn test_tutor_prompt_layout() {
        let messages = PromptBuilder::new()
            .tutor_system_prompt(&["primeiro", "segundo"], "aluno: oi")
            .user_message("O que é oxidação?")
            .build();

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert!(messages[0].content.starts_with("Seu nome é Lia."));
        assert!(messages[0]
            .content
            .contains("Contexto:\nprimeiro\n\nsegundo\n\nHistórico da conversa:\naluno: oi"));
        assert_eq!(messages[1], Message::user("O que é oxidação?"));
    }

    #[test]
    fn test_quiz_prompt_lists_used_questions() {
        let messages = PromptBuilder::new()
            .quiz_prompt("Química", "ctx", &["Pergunta: O que é um átomo?"])
            .build();

        assert_eq!(messages.len(), 1);
        let content = &messages[0].content;
        assert!(content.contains("'Química'"));
        assert!(content.contains("- Pergunta: O que é um átomo?"));
        assert!(content.contains("Resposta correta"));
    }

    #[test]
    fn test_quiz_prompt_without_history() {
        let none: [&str; 0] = [];
        let messages = PromptBuilder::new().quiz_prompt("Fé", "ctx", &none).build();
        assert!(messages[0].content.ends_with("Perguntas já feitas: nenhuma"));
    }
}
