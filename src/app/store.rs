//! Reactive state container.
//!
//! A [`StateStore`] is a request-scoped key/value map of JSON values. Writes
//! notify subscribers, and the full snapshot can be dehydrated into a
//! JavaScript literal that the client rehydrates from.

use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde_json::{Map, Value};

/// A change observed by store subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum StateEvent {
    Set { key: String, value: Value },
    Removed { key: String },
}

type Subscriber = Arc<dyn Fn(&StateEvent) + Send + Sync>;

#[derive(Default)]
struct Inner {
    state: RwLock<Map<String, Value>>,
    subscribers: Mutex<Vec<Subscriber>>,
}

/// Observable key/value store owned by a single application instance.
///
/// Clones share the same underlying map; a fresh store is created for every
/// request by [`crate::app::App::create`].
#[derive(Clone, Default)]
pub struct StateStore {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for StateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateStore")
            .field("keys", &self.keys())
            .finish_non_exhaustive()
    }
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Map<String, Value>> {
        self.inner.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Map<String, Value>> {
        self.inner.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.read().get(key).cloned()
    }

    /// Deserialize the value under `key`, if present and well-typed.
    pub fn get_as<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get(key).and_then(|v| serde_json::from_value(v).ok())
    }

    pub fn set(&self, key: impl Into<String>, value: Value) {
        let key = key.into();
        self.write().insert(key.clone(), value.clone());
        self.notify(&StateEvent::Set { key, value });
    }

    /// Apply several writes, notifying once per key.
    pub fn patch(&self, values: Map<String, Value>) {
        let events: Vec<StateEvent> = {
            let mut state = self.write();
            values
                .into_iter()
                .map(|(key, value)| {
                    state.insert(key.clone(), value.clone());
                    StateEvent::Set { key, value }
                })
                .collect()
        };
        for event in &events {
            self.notify(event);
        }
    }

    pub fn remove(&self, key: &str) -> Option<Value> {
        let removed = self.write().remove(key);
        if removed.is_some() {
            self.notify(&StateEvent::Removed {
                key: key.to_string(),
            });
        }
        removed
    }

    /// Register a callback invoked after every change.
    ///
    /// Callbacks run with no lock held, so they may write to the store.
    pub fn subscribe(&self, f: impl Fn(&StateEvent) + Send + Sync + 'static) {
        self.inner
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(f));
    }

    pub fn keys(&self) -> Vec<String> {
        self.read().keys().cloned().collect()
    }

    pub fn snapshot(&self) -> Map<String, Value> {
        self.read().clone()
    }

    fn notify(&self, event: &StateEvent) {
        let subscribers: Vec<Subscriber> = self
            .inner
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for subscriber in &subscribers {
            subscriber(event);
        }
    }
}

/// Serialize the store snapshot into a literal safe to embed in an inline
/// `<script>`.
pub fn dehydrate(store: &StateStore) -> String {
    let json = Value::Object(store.snapshot()).to_string();
    let mut out = String::with_capacity(json.len());
    for c in json.chars() {
        match c {
            '<' => out.push_str("\\u003C"),
            '>' => out.push_str("\\u003E"),
            '/' => out.push_str("\\u002F"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_get_remove() {
        let store = StateStore::new();
        store.set("novel", json!({"id": "1"}));
        assert_eq!(store.get("novel"), Some(json!({"id": "1"})));
        assert_eq!(store.remove("novel"), Some(json!({"id": "1"})));
        assert!(store.get("novel").is_none());
        assert!(store.remove("novel").is_none());
    }

    #[test]
    fn test_subscribers_see_every_change() {
        let store = StateStore::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        store.subscribe(move |e| sink.lock().unwrap().push(e.clone()));

        let mut patch = Map::new();
        patch.insert("a".to_string(), json!(1));
        patch.insert("b".to_string(), json!(2));
        store.patch(patch);
        store.remove("a");

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        assert_eq!(
            seen[2],
            StateEvent::Removed {
                key: "a".to_string()
            }
        );
    }

    #[test]
    fn test_subscriber_can_write_derived_state() {
        let store = StateStore::new();
        let writer = store.clone();
        store.subscribe(move |e| {
            if let StateEvent::Set { key, value } = e {
                if key == "novel" {
                    writer.set("title", value["title"].clone());
                }
            }
        });

        store.set("novel", json!({"title": "Moonfang"}));
        assert_eq!(store.get("title"), Some(json!("Moonfang")));
    }

    #[test]
    fn test_store_survives_panicking_subscriber() {
        let store = StateStore::new();
        store.subscribe(|e| {
            if matches!(e, StateEvent::Set { key, .. } if key == "boom") {
                panic!("subscriber failed");
            }
        });

        let panicking = store.clone();
        let result = std::thread::spawn(move || panicking.set("boom", json!(1))).join();
        assert!(result.is_err());

        store.set("after", json!(2));
        assert_eq!(store.get("after"), Some(json!(2)));
        assert_eq!(store.keys().len(), 2);
    }

    #[test]
    fn test_dehydrate_escapes_script_breakers() {
        let store = StateStore::new();
        store.set("title", json!("</script><script>alert(1)</script>\u{2028}"));
        let out = dehydrate(&store);
        assert!(!out.contains("</script>"));
        assert!(!out.contains('<'));
        assert!(out.contains("\\u003C\\u002Fscript\\u003E"));
        assert!(out.contains("\\u2028"));
    }

    #[test]
    fn test_dehydrate_round_trips_as_json() {
        let store = StateStore::new();
        store.set("chapter", json!({"title": "a/b <c>", "n": 3}));
        let parsed: Value = serde_json::from_str(&dehydrate(&store)).unwrap();
        assert_eq!(parsed["chapter"]["title"], "a/b <c>");
    }

    #[test]
    fn test_empty_store_dehydrates_to_empty_object() {
        assert_eq!(dehydrate(&StateStore::new()), "{}");
    }
}
