use wasm_bindgen::prelude::*;
use web_sys::EventTarget;

/// Event listener that stays registered for as long as the guard lives.
pub(crate) struct ListenerGuard {
	target: EventTarget,
	event: &'static str,
	callback: Closure<dyn FnMut()>,
}

impl ListenerGuard {
	pub(crate) fn attach(
		target: &EventTarget,
		event: &'static str,
		callback: Closure<dyn FnMut()>,
	) -> Result<Self, JsValue> {
		target.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())?;
		Ok(Self {
			target: target.clone(),
			event,
			callback,
		})
	}
}

impl Drop for ListenerGuard {
	fn drop(&mut self) {
		let _ = self
			.target
			.remove_event_listener_with_callback(self.event, self.callback.as_ref().unchecked_ref());
	}
}
