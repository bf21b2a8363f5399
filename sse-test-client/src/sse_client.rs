use anyhow::Result;
use colored::Color;
use eventsource_client::{self as es, Client};
use futures_util::stream::StreamExt;
use log::*;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

#[derive(Debug, Clone)]
pub struct Event {
    pub data: String,
    pub received_at: Instant,
}

/// One open `/sse` stream, read on a background task.
pub struct Connection {
    pub label: String,
    /// Colour the label is printed in
    pub color: Color,
    event_rx: mpsc::UnboundedReceiver<Event>,
    handle: tokio::task::JoinHandle<()>,
}

impl Connection {
    pub async fn establish(base_url: &str, label: String, color: Color) -> Result<Self> {
        let url = format!("{}/sse", base_url.trim_end_matches('/'));
        let (tx, rx) = mpsc::unbounded_channel();

        let client = es::ClientBuilder::for_url(&url)?.build();

        let task_label = label.clone();
        let handle = tokio::spawn(async move {
            let mut stream = client.stream();

            loop {
                match stream.next().await {
                    Some(Ok(es::SSE::Event(event))) => {
                        let event = Event {
                            data: event.data,
                            received_at: Instant::now(),
                        };

                        if tx.send(event).is_err() {
                            debug!("SSE receiver dropped for {}", task_label);
                            break;
                        }
                    }
                    Some(Ok(es::SSE::Comment(_))) => {
                        // The server never sends comments; ignore them if a proxy does
                    }
                    Some(Err(e)) => {
                        warn!("SSE error for {}: {}", task_label, e);
                    }
                    None => {
                        debug!("SSE stream ended for {}", task_label);
                        break;
                    }
                }
            }
        });

        Ok(Self {
            label,
            color,
            event_rx: rx,
            handle,
        })
    }

    pub async fn next_event(&mut self, timeout: Duration) -> Result<Event> {
        match tokio::time::timeout(timeout, self.event_rx.recv()).await {
            Ok(Some(event)) => Ok(event),
            Ok(None) => anyhow::bail!("SSE connection closed for {}", self.label),
            Err(_) => anyhow::bail!("Timeout waiting for an event on {}", self.label),
        }
    }

    /// Closes the underlying HTTP connection.
    pub fn close(self) {
        self.handle.abort();
    }
}
