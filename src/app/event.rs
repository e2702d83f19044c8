//! Application event abstraction.
//!
//! Terminal input, fired timers and background job results all arrive as
//! [`AppEvent`]s on one channel, so the main loop drains a single receiver.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent, MouseEvent};
use tokio::sync::mpsc;

use crate::core::catalog::{Catalog, CatalogError};
use crate::core::scheduler::{GalleryTimer, TimerId};

/// High-level events consumed by the application.
#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize(u16, u16),
    Tick,
    /// A gallery timer came due.
    Timer(TimerId, GalleryTimer),
    CatalogLoaded(Result<Catalog, CatalogError>),
    MediaDecoded {
        path: PathBuf,
        result: Result<Arc<image::RgbaImage>, String>,
    },
}

pub type EventSender = mpsc::UnboundedSender<AppEvent>;

/// Spawns a background task that polls the terminal for events and sends
/// them through `tx`.
pub fn spawn_event_reader(tx: EventSender, tick_rate: Duration) {
    tokio::spawn(async move {
        loop {
            // Poll with the tick rate so Tick events keep animations moving
            // even when nothing is happening.
            let has_event = event::poll(tick_rate).unwrap_or(false);
            if has_event {
                if let Ok(ev) = event::read() {
                    let app_event = match ev {
                        CtEvent::Key(k) => AppEvent::Key(k),
                        CtEvent::Mouse(m) => AppEvent::Mouse(m),
                        CtEvent::Resize(w, h) => AppEvent::Resize(w, h),
                        _ => continue,
                    };
                    if tx.send(app_event).is_err() {
                        break; // receiver dropped
                    }
                }
            } else if tx.send(AppEvent::Tick).is_err() {
                break;
            }
        }
    });
}
