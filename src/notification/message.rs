pub const SUBJECT: &str = "Tu Regalo de tu Amigo Invisible 🎁";

/// Email telling a giver who they gift. Plain text, UTF-8
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl Notification {
    pub fn gift_assignment(from: &str, to: &str, recipient_name: &str) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
            subject: SUBJECT.to_string(),
            body: format!("Hola! Tu amigo invisible es: {recipient_name}\n¡Feliz Navidad!"),
        }
    }

    /// What would have been sent, used in dry run mode
    pub fn preview(&self) -> String {
        format!(
            "----- SIMULACIÓN: vista previa del correo -----\n\
             De: {}\n\
             Para: {}\n\
             Asunto: {}\n\
             {}\n\
             -----------------------------------------------",
            self.from, self.to, self.subject, self.body
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_names_recipient() {
        let n = Notification::gift_assignment("santa@example.com", "ana@example.com", "Beto");
        assert_eq!(n.from, "santa@example.com");
        assert_eq!(n.to, "ana@example.com");
        assert_eq!(n.subject, SUBJECT);
        assert_eq!(n.body, "Hola! Tu amigo invisible es: Beto\n¡Feliz Navidad!");
    }

    #[test]
    fn preview_has_headers_and_body() {
        let n = Notification::gift_assignment("santa@example.com", "ana@example.com", "Beto");
        let preview = n.preview();
        assert!(preview.contains("De: santa@example.com\n"));
        assert!(preview.contains("Para: ana@example.com\n"));
        assert!(preview.contains("Tu amigo invisible es: Beto"));
        assert!(preview.starts_with("----- SIMULACIÓN"));
    }
}
