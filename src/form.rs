use log::warn;

use crate::sim::{ParamField, Setup};

const MAX_INPUT_LEN: usize = 24;

pub fn format_value(value: f64) -> String {
    format!("{:.3e}", value)
}

/// Text entries for every [`ParamField`], in `ParamField::all()` order.
pub struct ParamForm {
    defaults: Setup,
    texts: Vec<String>,
    selected: usize,
    // Buffer of the entry being typed into; the committed text stays in `texts`.
    editing: Option<String>,
}

impl ParamForm {
    pub fn new(defaults: Setup) -> Self {
        let mut form = Self {
            defaults,
            texts: Vec::new(),
            selected: 0,
            editing: None,
        };
        form.restore_defaults();
        form
    }

    pub fn restore_defaults(&mut self) {
        self.texts = ParamField::all()
            .iter()
            .map(|&f| format_value(self.defaults.get(f)))
            .collect();
        self.editing = None;
    }

    pub fn entries(&self) -> impl Iterator<Item = (ParamField, &str)> {
        ParamField::all().iter().copied().zip(self.texts.iter().map(String::as_str))
    }

    #[cfg(test)]
    pub fn text(&self, field: ParamField) -> &str {
        &self.texts[Self::index(field)]
    }

    #[cfg(test)]
    pub fn set_text(&mut self, field: ParamField, text: &str) {
        self.texts[Self::index(field)] = text.to_string();
    }

    pub fn selected(&self) -> ParamField {
        ParamField::all()[self.selected]
    }

    pub fn select_next(&mut self) {
        self.selected = (self.selected + 1) % self.texts.len();
    }

    pub fn select_prev(&mut self) {
        let n = self.texts.len();
        self.selected = (self.selected + n - 1) % n;
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    pub fn edit_buffer(&self) -> Option<&str> {
        self.editing.as_deref()
    }

    /// Start typing into the selected entry. Static entries refuse while
    /// the animation is playing.
    pub fn begin_edit(&mut self, playing: bool) -> bool {
        if playing && self.selected().is_static() {
            return false;
        }
        self.editing = Some(self.texts[self.selected].clone());
        true
    }

    pub fn push_char(&mut self, c: char) {
        if let Some(buffer) = self.editing.as_mut() {
            if buffer.chars().count() < MAX_INPUT_LEN && !c.is_control() {
                buffer.push(c);
            }
        }
    }

    pub fn pop_char(&mut self) {
        if let Some(buffer) = self.editing.as_mut() {
            buffer.pop();
        }
    }

    pub fn clear_buffer(&mut self) {
        if let Some(buffer) = self.editing.as_mut() {
            buffer.clear();
        }
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    pub fn commit_edit(&mut self) {
        if let Some(buffer) = self.editing.take() {
            self.texts[self.selected] = buffer;
        }
    }

    /// Parse every entry. An entry that does not parse falls back to its
    /// default; all entries are rewritten in canonical form.
    pub fn read(&mut self) -> Setup {
        let mut setup = self.defaults;
        for (i, &field) in ParamField::all().iter().enumerate() {
            let value = match field.parse(&self.texts[i]) {
                Ok(value) => value,
                Err(err) => {
                    let fallback = self.defaults.get(field);
                    warn!("{}: {}; using default {:e}", field.label(), err, fallback);
                    fallback
                }
            };
            setup.set(field, value);
            self.texts[i] = format_value(value);
        }
        setup
    }

    #[cfg(test)]
    fn index(field: ParamField) -> usize {
        ParamField::all()
            .iter()
            .position(|&f| f == field)
            .unwrap_or_default()
    }
}
