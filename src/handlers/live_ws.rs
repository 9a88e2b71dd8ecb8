use actix_web::{HttpRequest, HttpResponse, web};
use actix_ws::Message;
use tokio::sync::broadcast::error::RecvError;

use crate::viewmodel::{AttendanceViewModel, ViewEvent};

/// WebSocket upgrade handler. Sends the current counts, then forwards each
/// shared view event (roster snapshots) as a JSON text frame.
pub async fn ws_connect(
    req: HttpRequest,
    body: web::Payload,
    vm: web::Data<AttendanceViewModel>,
) -> Result<HttpResponse, actix_web::Error> {
    let (response, mut ws_session, mut msg_stream) = actix_ws::handle(&req, body)?;

    let mut events = vm.subscribe_events();
    let metrics = vm.metrics();
    let initial = ViewEvent::Snapshot {
        total: metrics.total,
        presentes: metrics.presentes,
    };

    actix_web::rt::spawn(async move {
        if let Ok(text) = serde_json::to_string(&initial) {
            if ws_session.text(text).await.is_err() {
                return;
            }
        }

        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Ok(event) if !event.is_shared() => {}
                    Ok(event) => {
                        let Ok(text) = serde_json::to_string(&event) else {
                            continue;
                        };
                        if ws_session.text(text).await.is_err() {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        log::debug!("WebSocket client lagged, skipped {} events", skipped);
                    }
                    Err(RecvError::Closed) => break,
                },
                msg = msg_stream.recv() => match msg {
                    Some(Ok(Message::Ping(bytes))) => {
                        if ws_session.pong(&bytes).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    // Client actions go through HTTP, not WS
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        log::debug!("WebSocket protocol error: {}", e);
                        break;
                    }
                },
            }
        }

        let _ = ws_session.close(None).await;
    });

    Ok(response)
}
