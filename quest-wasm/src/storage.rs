use quest_core::{ProgressStore, QuestError};
use wasm_bindgen::JsValue;
use web_sys::{Storage, Window};

/// `ProgressStore` on top of the browser's `localStorage`.
pub struct LocalStorage {
    inner: Storage,
}

impl LocalStorage {
    pub fn open(window: &Window) -> Result<Self, JsValue> {
        let inner = window
            .local_storage()?
            .ok_or_else(|| JsValue::from_str("localStorage not available"))?;
        Ok(LocalStorage { inner })
    }
}

fn js_err(e: JsValue) -> QuestError {
    QuestError::Storage(format!("{e:?}"))
}

impl ProgressStore for LocalStorage {
    fn read(&self, key: &str) -> Result<Option<String>, QuestError> {
        self.inner.get_item(key).map_err(js_err)
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), QuestError> {
        self.inner.set_item(key, value).map_err(js_err)
    }

    fn remove(&mut self, key: &str) -> Result<(), QuestError> {
        self.inner.remove_item(key).map_err(js_err)
    }
}
