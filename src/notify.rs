use notify_rust::Notification;

/// best-effort desktop notification. runs on its own thread so a slow or
/// missing notification daemon never stalls the gui, and a failure is only
/// ever logged.
pub fn send(title: &str, body: &str) {
    let title = title.to_owned();
    let body = body.to_owned();
    std::thread::spawn(move || {
        if let Err(error) = Notification::new()
            .summary(&title)
            .body(&body)
            .appname("pesky_clock")
            .show()
        {
            log::warn!("couldn't show notification: {error}");
        }
    });
}

pub fn alarm_fired() {
    send(
        "Pesky Clock",
        "Time to get annoyed! The reverse alarm is going off.",
    );
}
