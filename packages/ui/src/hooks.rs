use dioxus::prelude::*;
use futures::channel::mpsc::{unbounded, UnboundedSender};
use futures::StreamExt;

/// A signal fed through a channel, so platform callbacks on any thread can
/// update it. The receiving task lives as long as the calling component.
pub(crate) fn use_channel_signal<T: 'static>(
    init: impl FnOnce() -> T,
) -> (Signal<T>, UnboundedSender<T>) {
    let mut signal = use_signal(init);
    let sender = use_hook(|| {
        let (sender, mut receiver) = unbounded::<T>();
        spawn(async move {
            while let Some(value) = receiver.next().await {
                signal.set(value);
            }
        });
        sender
    });
    (signal, sender)
}
