use tracing::{debug, warn};

use crate::models::{ChatReply, ChatTurn, Gallery};

use super::Services;

/// Model turn appended when the assistant answers with outfit images
pub const OUTFITS_REPLY: &str = "Here are some outfit options I found for you:";

/// Model turn appended when the reply had neither text nor images
pub const UNEXPECTED_REPLY: &str = "Hmm, I received an unexpected response format.";

/// Outfit-recommendation conversation. Turns live only as long as the screen.
#[derive(Debug, Default)]
pub struct ChatScreen {
    conversation: Vec<ChatTurn>,
    gallery: Option<Gallery>,
}

impl ChatScreen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn conversation(&self) -> &[ChatTurn] {
        &self.conversation
    }

    pub fn gallery(&self) -> Option<&Gallery> {
        self.gallery.as_ref()
    }

    pub fn gallery_mut(&mut self) -> Option<&mut Gallery> {
        self.gallery.as_mut()
    }

    /// Send a message and append the assistant's answer.
    ///
    /// Blank input is ignored and `false` returned. The previous gallery is
    /// dropped before the request goes out; failures become a model turn
    /// rather than an error.
    pub async fn send(&mut self, input: &str, services: &Services) -> bool {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return false;
        }

        self.conversation.push(ChatTurn::user(trimmed));
        self.gallery = None;

        let access_token = services.session.access_token().unwrap_or_else(|e| {
            warn!(error = %e, "Failed to read access token, chatting anonymously");
            None
        });

        let answer = match services
            .api
            .chat(&self.conversation, access_token.as_deref())
            .await
        {
            Ok(ChatReply::Outfits(images)) => {
                debug!(sections = images.len(), "Outfit images received");
                self.gallery = Some(Gallery::new(images));
                OUTFITS_REPLY.to_string()
            }
            Ok(ChatReply::Message(message)) => message,
            Ok(ChatReply::Unexpected) => UNEXPECTED_REPLY.to_string(),
            Err(e) => {
                warn!(error = %e, "Chat request failed");
                format!("Request failed: {}", e)
            }
        };

        self.conversation.push(ChatTurn::model(answer));
        true
    }

    /// Start over with an empty conversation
    pub fn reset(&mut self) {
        self.conversation.clear();
        self.gallery = None;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::auth::MemoryStore;
    use crate::models::{ChatRole, ImagesByType};
    use crate::testing::{server_error, MockApi};

    fn setup() -> (Arc<MockApi>, Services) {
        let api = Arc::new(MockApi::new());
        let services = Services::new(api.clone(), Arc::new(MemoryStore::new()));
        (api, services)
    }

    #[tokio::test]
    async fn test_send_appends_turns_and_sends_whole_conversation() {
        let (api, services) = setup();
        services.session.save_session("J1", "R1", "a@b.com").unwrap();
        api.push_chat(Ok(ChatReply::Message("What's the occasion?".to_string())));
        api.push_chat(Ok(ChatReply::Message("Try the linen shirt.".to_string())));

        let mut screen = ChatScreen::new();
        assert!(screen.send("  I need an outfit ", &services).await);
        assert!(screen.send("a wedding", &services).await);

        let turns = screen.conversation();
        assert_eq!(turns.len(), 4);
        assert_eq!(turns[0], ChatTurn::user("I need an outfit"));
        assert_eq!(turns[1], ChatTurn::model("What's the occasion?"));
        assert_eq!(turns[3].role, ChatRole::Model);

        assert_eq!(api.calls(), vec!["chat:1:J1", "chat:3:J1"]);
        assert_eq!(api.last_conversation().last(), Some(&ChatTurn::user("a wedding")));
    }

    #[tokio::test]
    async fn test_blank_input_is_ignored() {
        let (api, services) = setup();
        let mut screen = ChatScreen::new();
        assert!(!screen.send("   ", &services).await);
        assert!(screen.conversation().is_empty());
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_outfit_reply_opens_gallery_until_next_send() {
        let (api, services) = setup();
        let mut images = ImagesByType::new();
        images.insert("top".to_string(), vec!["/9j/a".to_string(), "/9j/b".to_string()]);
        api.push_chat(Ok(ChatReply::Outfits(images)));
        api.push_chat(Ok(ChatReply::Unexpected));

        let mut screen = ChatScreen::new();
        screen.send("show me tops", &services).await;
        assert_eq!(screen.conversation()[1].content, OUTFITS_REPLY);
        let gallery = screen.gallery_mut().expect("gallery should be open");
        gallery.next("top");
        assert_eq!(gallery.current("top"), Some("/9j/b"));

        screen.send("thanks", &services).await;
        assert!(screen.gallery().is_none());
        assert_eq!(screen.conversation()[3].content, UNEXPECTED_REPLY);
        // Signed out: no token is attached
        assert_eq!(api.calls(), vec!["chat:1:-", "chat:3:-"]);
    }

    #[tokio::test]
    async fn test_failure_becomes_model_turn_and_reset_clears() {
        let (api, services) = setup();
        api.push_chat(Err(server_error("model_down")));

        let mut screen = ChatScreen::new();
        screen.send("hello", &services).await;
        assert_eq!(
            screen.conversation()[1].content,
            "Request failed: Server rejected request (400): model_down"
        );

        screen.reset();
        assert!(screen.conversation().is_empty());
        assert!(screen.gallery().is_none());
    }
}
