// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

pub trait FlumeSenderExt<T> {
    /// Sends `msg`, logging instead of failing when every receiver is gone.
    /// Returns whether the message was delivered.
    fn send_or_warn(&self, msg: T) -> bool;
}

impl<T> FlumeSenderExt<T> for flume::Sender<T> {
    fn send_or_warn(&self, msg: T) -> bool {
        match self.send(msg) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("{e}");
                false
            }
        }
    }
}
