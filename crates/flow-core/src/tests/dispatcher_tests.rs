//! Tests for the dispatch loop
//!
//! Covers:
//! - Logout and disconnect stop conditions
//! - Teardown after the loop ends
//! - Clock ticks while idle

use super::fixtures::{abc_fixture, button, started_shell};
use crate::catalog::AppCatalog;
use crate::dispatcher::{StopReason, run};
use crate::display::{Event, WindowHandle};
use crate::hotkey::Hotkey;
use crate::layout::MENU_GEOMETRY;
use crate::registry::Widget;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::mpsc;

fn catalog(temp: &TempDir) -> AppCatalog {
    abc_fixture(temp.path());
    AppCatalog::new(vec![temp.path().to_path_buf()])
}

#[tokio::test]
async fn test_logout_stops_loop_and_releases_widgets() {
    let temp = TempDir::new().unwrap();
    let mut shell = started_shell(catalog(&temp));
    let logout = button(&shell, "Logout");
    let (tx, rx) = mpsc::unbounded_channel();

    tx.send(Event::Hotkey(Hotkey::Menu)).unwrap();
    tx.send(Event::ButtonPress {
        window: logout,
        x: 5,
        y: 5,
    })
    .unwrap();

    let reason = run(&mut shell, rx).await;

    assert_eq!(reason, StopReason::Logout);
    assert!(shell.registry().is_empty());
    assert!(shell.display().live.is_empty());
    assert!(shell.popup().handle().is_none());
}

#[tokio::test]
async fn test_closed_queue_reports_disconnect() {
    let temp = TempDir::new().unwrap();
    let mut shell = started_shell(catalog(&temp));
    let (tx, rx) = mpsc::unbounded_channel();
    tx.send(Event::Hotkey(Hotkey::VolumeUp)).unwrap();
    drop(tx);

    let reason = run(&mut shell, rx).await;

    assert_eq!(reason, StopReason::Disconnected);
    assert!(shell.registry().is_empty());
    assert!(
        shell
            .launcher()
            .commands()
            .iter()
            .any(|c| c.contains("+5%"))
    );
}

#[tokio::test]
async fn test_events_drain_in_order_before_logout() {
    let temp = TempDir::new().unwrap();
    let mut shell = started_shell(catalog(&temp));
    let term = button(&shell, "Term");
    let web = button(&shell, "Web");
    let logout = button(&shell, "Logout");
    let (tx, rx) = mpsc::unbounded_channel();

    for window in [term, web, logout, term] {
        tx.send(Event::ButtonPress { window, x: 5, y: 5 }).unwrap();
    }

    run(&mut shell, rx).await;

    // The press queued after logout is never handled
    let commands = shell.launcher().commands();
    assert_eq!(&commands[1..], &["xterm", "x-www-browser"]);
}

#[tokio::test(start_paused = true)]
async fn test_clock_ticks_while_idle() {
    let temp = TempDir::new().unwrap();
    let mut shell = started_shell(catalog(&temp));
    let logout = button(&shell, "Logout");
    let clock = shell.clock().unwrap();
    let (tx, rx) = mpsc::unbounded_channel();

    let sender = async move {
        tokio::time::sleep(Duration::from_millis(3500)).await;
        tx.send(Event::ButtonPress {
            window: logout,
            x: 5,
            y: 5,
        })
        .unwrap();
    };
    let (reason, ()) = tokio::join!(run(&mut shell, rx), sender);

    assert_eq!(reason, StopReason::Logout);
    let clock_draws = shell
        .display()
        .texts
        .iter()
        .filter(|(window, _)| *window == clock)
        .count();
    // Ticks at 0s, 1s, 2s and 3s
    assert!(clock_draws >= 4, "only {clock_draws} clock draws");
}

#[tokio::test]
async fn test_unknown_windows_do_not_stop_loop() {
    let temp = TempDir::new().unwrap();
    let mut shell = started_shell(catalog(&temp));
    let (tx, rx) = mpsc::unbounded_channel();
    tx.send(Event::Expose {
        window: WindowHandle(0xbeef),
    })
    .unwrap();
    tx.send(Event::Hotkey(Hotkey::Menu)).unwrap();
    drop(tx);

    let reason = run(&mut shell, rx).await;

    assert_eq!(reason, StopReason::Disconnected);
    let popup_created = shell
        .display()
        .created
        .iter()
        .any(|c| c.geometry == MENU_GEOMETRY);
    assert!(popup_created);
    assert!(!shell.registry().iter().any(|(_, w)| *w == Widget::Popup));
}
