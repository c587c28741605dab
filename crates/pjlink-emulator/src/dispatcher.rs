//! Request dispatch.
//!
//! Maps one request line to exactly one [`Response`]:
//!
//! | Request      | Reply                                        |
//! |--------------|----------------------------------------------|
//! | `POWR ?`     | `%1POWR=<0-3>` after resolving transitions   |
//! | `POWR 0`/`1` | `%1POWR=OK`                                  |
//! | `INPT ?`     | `%1INPT=<code>`                              |
//! | `INPT <n>`   | `%1INPT=OK`, or `Invalid Command` if invalid |
//! | `NAME ?`     | `%1NAME=<name>`                              |
//! | `LAMP ?`     | `%1LAMP=<hours>`, or `%1LAMP=ERR1`           |
//! | `CLSS ?`     | `%1CLSS=<1-2>`                               |
//!
//! Anything that fails to parse is answered with `Invalid Command`.

use tracing::{debug, trace, warn};

use pjlink_protocol::{Mnemonic, Request, Response};

use crate::SharedDevice;

/// Parse one line and dispatch it against the device.
///
/// Never fails: every line gets a reply.
pub async fn handle_line(device: &SharedDevice, line: &str) -> Response {
    match Request::parse(line) {
        Ok(request) => dispatch(device, request).await,
        Err(e) => {
            debug!(line, error = %e, "Rejected request");
            Response::from_error(None, &e)
        }
    }
}

/// Execute a parsed request against the device.
pub async fn dispatch(device: &SharedDevice, request: Request) -> Response {
    trace!(?request, "Dispatching request");

    let mnemonic = request.mnemonic();
    let write = request.is_write();
    let response = match request {
        Request::Query(Mnemonic::Power) => Response::value(mnemonic, device.power().await.to_u8()),
        Request::Query(Mnemonic::Name) => Response::value(mnemonic, device.name().await),
        Request::Query(Mnemonic::Input) => Response::value(mnemonic, device.input().await),
        Request::Query(Mnemonic::Class) => Response::value(mnemonic, device.class().await),
        Request::Query(Mnemonic::Lamp) => match device.remaining_lamp_hours().await {
            Ok(hours) => Response::value(mnemonic, hours),
            Err(e) => {
                warn!(error = %e, "Lamp query on lamp-less device");
                Response::from_error(Some(mnemonic), &e)
            }
        },
        Request::PowerOn => {
            device.request_power_on().await;
            Response::Ok(mnemonic)
        }
        Request::PowerOff => {
            device.request_power_off().await;
            Response::Ok(mnemonic)
        }
        Request::SetInput(code) => match device.set_input(code).await {
            Ok(_) => Response::Ok(mnemonic),
            Err(e) => Response::from_error(Some(mnemonic), &e),
        },
    };

    debug!(%mnemonic, write, success = response.is_success(), "Request handled");
    response
}
