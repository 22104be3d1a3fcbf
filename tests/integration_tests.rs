use std::path::PathBuf;
use std::sync::Arc;

use folio::profile::Profile;

fn data_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data").join(name)
}

fn sample_profile() -> Arc<Profile> {
    Arc::new(Profile::load_from_file(data_path("resume.json")).unwrap())
}

#[cfg(test)]
mod config_tests {
    use folio::config::Config;
    use folio::view::View;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.terminal.prompt, "visitor@folio:~$");
        assert_eq!(config.terminal.live_feed_interval_ms, 3000);
        assert_eq!(config.ai.model, "gemini-2.0-flash");
        assert_eq!(config.data.profile_path.to_str(), Some("data/resume.json"));
    }

    #[test]
    fn test_config_load() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.yaml");

        let yaml = r##"
app:
  default_view: terminal
terminal:
  prompt: "guest@cv:~$"
theme:
  accent: "#AABBCC"
"##;
        std::fs::write(&config_path, yaml).unwrap();

        let loaded = Config::load_from_file(&config_path).unwrap();
        assert_eq!(loaded.app.default_view, View::Terminal);
        assert_eq!(loaded.terminal.prompt, "guest@cv:~$");
        assert_eq!(loaded.terminal.max_feed_lines, 100);
        assert_eq!(loaded.theme.accent, "#AABBCC");
    }

    #[test]
    fn test_config_save_round_trip() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("nested").join("config.yaml");

        let mut config = Config::default();
        config.ai.api_key_env = "FOLIO_KEY".to_string();
        config.save_to_file(&config_path).unwrap();

        let loaded = Config::load_from_file(&config_path).unwrap();
        assert_eq!(loaded.ai.api_key_env, "FOLIO_KEY");
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(Config::load_from_file(dir.path().join("absent.yaml")).is_err());
    }

    #[test]
    fn test_shipped_example_config_parses() {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("config.example.yaml");
        let config = Config::load_from_file(path).unwrap();
        assert_eq!(config.app.default_view, View::Profile);
        assert_eq!(config.ai.api_key_env, "GEMINI_API_KEY");
    }
}

#[cfg(test)]
mod profile_tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_shipped_profile_loads() {
        let profile = sample_profile();
        assert_eq!(profile.personal.name, "Alex Morgan");
        assert_eq!(profile.skills.iter().count(), 8);
        assert_eq!(profile.certifications.len(), 3);
        assert!(profile.experience[0].current);
    }

    #[test]
    fn test_malformed_profile_reports_path() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "{ not json").unwrap();
        let err = Profile::load_from_file(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains(&file.path().display().to_string()));
    }
}

#[cfg(test)]
mod terminal_tests {
    use super::*;
    use folio::commands::CommandRegistry;
    use folio::terminal::input::InputAction;
    use folio::terminal::{AskTicket, TerminalEmulator};

    fn terminal(profile: Option<Arc<Profile>>) -> TerminalEmulator {
        let mut terminal = TerminalEmulator::new("visitor@folio:~$", CommandRegistry::new(profile));
        terminal.init();
        terminal
    }

    fn run(terminal: &mut TerminalEmulator, line: &str) -> Option<AskTicket> {
        for c in line.chars() {
            terminal.handle(InputAction::Insert(c));
        }
        terminal.handle(InputAction::Submit)
    }

    fn text(terminal: &TerminalEmulator) -> Vec<String> {
        terminal.lines().map(|l| l.text()).collect()
    }

    #[test]
    fn test_banner_names_owner() {
        let terminal = terminal(Some(sample_profile()));
        assert!(text(&terminal)[0].contains("Alex Morgan's portfolio terminal"));
    }

    #[test]
    fn test_every_registry_command_renders() {
        let mut terminal = terminal(Some(sample_profile()));
        for command in ["whoami", "skills", "experience", "projects", "certs", "contact", "resume", "help"] {
            let before = terminal.line_count();
            assert!(run(&mut terminal, command).is_none());
            assert!(
                terminal.line_count() > before + 1,
                "{command} produced no output"
            );
            assert!(!text(&terminal).iter().any(|l| l.contains("command not found")));
        }
    }

    #[test]
    fn test_clear_then_whoami() {
        let mut terminal = terminal(Some(sample_profile()));
        run(&mut terminal, "skills");
        run(&mut terminal, "clear");
        run(&mut terminal, "whoami");
        let lines = text(&terminal);
        assert!(lines[0].starts_with("Terminal cleared."));
        assert_eq!(lines[1], "visitor@folio:~$ whoami");
        assert!(lines.iter().any(|l| l.contains("Alex Morgan")));
        assert!(!lines.iter().any(|l| l.contains("[Cloud Platforms]")));
    }

    #[test]
    fn test_missing_profile() {
        let mut terminal = terminal(None);
        assert!(text(&terminal)[0].contains("my portfolio terminal"));
        run(&mut terminal, "skills");
        assert!(text(&terminal)
            .last()
            .unwrap()
            .contains("Resume data not loaded"));
        run(&mut terminal, "help");
        assert!(text(&terminal).iter().any(|l| l.contains("whoami")));
    }

    #[test]
    fn test_ask_produces_ticket() {
        let mut terminal = terminal(Some(sample_profile()));
        let ticket = run(&mut terminal, "ask 'what is your strongest skill?'").unwrap();
        assert_eq!(ticket.question, "what is your strongest skill?");
        assert!(run(&mut terminal, "ask '   '").is_none());
    }
}

#[cfg(test)]
mod bridge_tests {
    use super::*;
    use folio::ai::{AiBridge, GeminiClient, TextGenerator, FAILURE_MESSAGE};
    use folio::error::BridgeError;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    fn http_response(status: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        )
    }

    fn request_complete(request: &[u8]) -> bool {
        let text = String::from_utf8_lossy(request);
        let Some(header_end) = text.find("\r\n\r\n") else {
            return false;
        };
        let content_length = text[..header_end]
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                name.eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse::<usize>().ok())
                    .flatten()
            })
            .unwrap_or(0);
        request.len() >= header_end + 4 + content_length
    }

    /// Serve one canned response and hand back the raw request
    async fn serve_once(response: String) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 8192];
            while !request_complete(&request) {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
            String::from_utf8_lossy(&request).into_owned()
        });
        (format!("http://{addr}"), handle)
    }

    fn client(endpoint: &str) -> GeminiClient {
        GeminiClient::new(endpoint, "test-model", "FOLIO_TEST_KEY", Some("test-key".to_string()))
    }

    #[tokio::test]
    async fn test_http_500_becomes_apology() {
        let (endpoint, server) = serve_once(http_response("500 Internal Server Error", "{}")).await;
        let bridge = AiBridge::new(Some(sample_profile()), Arc::new(client(&endpoint)));

        assert_eq!(bridge.ask("What do you do?").await, FAILURE_MESSAGE);

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /models/test-model:generateContent HTTP/1.1"));
        assert!(request.to_lowercase().contains("x-goog-api-key: test-key"));
    }

    #[tokio::test]
    async fn test_success_returns_generated_text() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"I run Kubernetes platforms."}],"role":"model"}}]}"#;
        let (endpoint, server) = serve_once(http_response("200 OK", body)).await;
        let bridge = AiBridge::new(Some(sample_profile()), Arc::new(client(&endpoint)));

        assert_eq!(bridge.ask("What do you do?").await, "I run Kubernetes platforms.");

        let request = server.await.unwrap();
        let body_start = request.find("\r\n\r\n").unwrap() + 4;
        let sent: serde_json::Value = serde_json::from_str(&request[body_start..]).unwrap();
        assert_eq!(sent["contents"][0]["role"], "user");
        let prompt = sent["contents"][0]["parts"][0]["text"].as_str().unwrap();
        assert!(prompt.contains("Name: Alex Morgan"));
        assert!(prompt.contains("What do you do?"));
    }

    #[tokio::test]
    async fn test_malformed_body_is_reported() {
        let (endpoint, _server) =
            serve_once(http_response("200 OK", r#"{"candidates":[]}"#)).await;
        let result = client(&endpoint).generate("prompt").await;
        assert!(matches!(result, Err(BridgeError::MalformedResponse)));
    }

    #[tokio::test]
    async fn test_non_json_body_is_reported() {
        let (endpoint, _server) = serve_once(http_response("200 OK", "<html>")).await;
        let result = client(&endpoint).generate("prompt").await;
        assert!(matches!(result, Err(BridgeError::MalformedResponse)));
    }

    #[tokio::test]
    async fn test_status_is_reported() {
        let (endpoint, _server) = serve_once(http_response("429 Too Many Requests", "{}")).await;
        let result = client(&endpoint).generate("prompt").await;
        assert!(matches!(result, Err(BridgeError::Status(429))));
    }

    #[tokio::test]
    async fn test_connection_refused_becomes_apology() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let bridge = AiBridge::new(Some(sample_profile()), Arc::new(client(&endpoint)));
        assert_eq!(bridge.ask("hi").await, FAILURE_MESSAGE);
    }
}

#[cfg(test)]
mod view_tests {
    use super::*;
    use folio::commands::CommandRegistry;
    use folio::live_feed::LiveFeed;
    use folio::terminal::TerminalEmulator;
    use folio::ui::Screen;
    use folio::view::{View, ViewManager};
    use std::time::Duration;
    use tokio::sync::mpsc::unbounded_channel;

    #[tokio::test(start_paused = true)]
    async fn test_feed_follows_view_and_focus() {
        let (tx, mut rx) = unbounded_channel();
        let mut feed = LiveFeed::new(Duration::from_millis(3000), data_path("achievements.json"), tx);
        let mut terminal = TerminalEmulator::new("$", CommandRegistry::new(Some(sample_profile())));
        let mut screen = Screen::new();
        let mut views = ViewManager::new();

        views.switch_to(View::Profile, &mut terminal, &mut feed, &mut screen);
        assert_eq!(screen.showing(), Some(View::Profile));
        assert!(!feed.is_running());

        views.toggle(false, &mut terminal, &mut feed, &mut screen);
        assert_eq!(screen.showing(), Some(View::Terminal));
        assert!(screen.input_focused());
        tokio::time::sleep(Duration::from_millis(1600)).await;
        let mut received = 0;
        while rx.try_recv().is_ok() {
            received += 1;
        }
        assert_eq!(received, 2);

        views.set_page_visible(false, &mut feed);
        tokio::time::sleep(Duration::from_millis(10_000)).await;
        assert!(rx.try_recv().is_err());

        views.set_page_visible(true, &mut feed);
        assert!(feed.is_running());
        views.toggle(false, &mut terminal, &mut feed, &mut screen);
        assert!(!feed.is_running());
        assert_eq!(feed.achievements().await.len(), 9);
    }
}
