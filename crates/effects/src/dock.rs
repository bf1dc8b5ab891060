//! Keyboard model of the control dock: which control is selected, whether
//! the dock is expanded, and how key presses turn into control changes.

use crate::controls::{Control, ControlKind, ControlValue};
use crate::effect::Effect;
use crate::error::EffectError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dock {
    expanded: bool,
    selected: usize,
}

impl Default for Dock {
    fn default() -> Self {
        Self {
            expanded: true,
            selected: 0,
        }
    }
}

/// A change the dock applied to the effect.
#[derive(Debug, Clone, PartialEq)]
pub struct DockChange {
    pub id: &'static str,
    pub value: ControlValue,
}

impl Dock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub fn toggle(&mut self) {
        self.expanded = !self.expanded;
    }

    /// Resets the selection, e.g. after switching effects.
    pub fn reset(&mut self) {
        self.selected = 0;
    }

    pub fn selected_index(&self, controls: &[Control]) -> Option<usize> {
        if controls.is_empty() {
            None
        } else {
            Some(self.selected.min(controls.len() - 1))
        }
    }

    pub fn select_next(&mut self, controls: &[Control]) {
        if let Some(index) = self.selected_index(controls) {
            self.selected = (index + 1) % controls.len();
        }
    }

    pub fn select_previous(&mut self, controls: &[Control]) {
        if let Some(index) = self.selected_index(controls) {
            self.selected = (index + controls.len() - 1) % controls.len();
        }
    }

    /// Nudges the selected control. A collapsed dock ignores input.
    pub fn adjust(
        &mut self,
        effect: &mut dyn Effect,
        direction: i32,
    ) -> Result<Option<DockChange>, EffectError> {
        if !self.expanded {
            return Ok(None);
        }
        let controls = effect.controls();
        let Some(index) = self.selected_index(&controls) else {
            return Ok(None);
        };
        let control = &controls[index];
        let value = effect.apply(control.id, control.nudge(direction))?;
        Ok(Some(DockChange {
            id: control.id,
            value,
        }))
    }

    /// Flips toggles and advances pickers/colors; sliders are left alone.
    pub fn activate(&mut self, effect: &mut dyn Effect) -> Result<Option<DockChange>, EffectError> {
        if !self.expanded {
            return Ok(None);
        }
        let controls = effect.controls();
        let Some(index) = self.selected_index(&controls) else {
            return Ok(None);
        };
        if matches!(controls[index].kind, ControlKind::Slider { .. }) {
            return Ok(None);
        }
        self.adjust(effect, 1)
    }

    /// One-line status for the window title: selected control and position.
    pub fn summary(&self, controls: &[Control]) -> String {
        if !self.expanded {
            return "dock hidden (Tab)".to_string();
        }
        match self.selected_index(controls) {
            Some(index) => {
                let control = &controls[index];
                format!(
                    "{}: {} [{}/{}]",
                    control.label,
                    control.display_value(),
                    index + 1,
                    controls.len()
                )
            }
            None => "no controls".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::EffectKind;
    use crate::effect::create;

    #[test]
    fn selection_wraps_in_both_directions() {
        let effect = create(EffectKind::Orb);
        let controls = effect.controls();
        let mut dock = Dock::new();
        dock.select_previous(&controls);
        assert_eq!(dock.selected_index(&controls), Some(controls.len() - 1));
        dock.select_next(&controls);
        assert_eq!(dock.selected_index(&controls), Some(0));
    }

    #[test]
    fn adjust_applies_to_effect() {
        let mut effect = create(EffectKind::Dither);
        let controls = effect.controls();
        let slider = controls
            .iter()
            .position(|control| matches!(control.kind, ControlKind::Slider { .. }))
            .unwrap();
        let mut dock = Dock::new();
        for _ in 0..slider {
            dock.select_next(&controls);
        }
        let before = controls[slider].value.as_float().unwrap();
        let change = dock.adjust(effect.as_mut(), 1).unwrap().unwrap();
        let after = effect.controls()[slider].value.as_float().unwrap();
        assert!(after > before);
        assert_eq!(change.value, ControlValue::Float(after));
    }

    #[test]
    fn collapsed_dock_ignores_input() {
        let mut effect = create(EffectKind::Dither);
        let mut dock = Dock::new();
        dock.toggle();
        assert!(dock.adjust(effect.as_mut(), 1).unwrap().is_none());
        assert!(dock.summary(&effect.controls()).contains("hidden"));
    }

    #[test]
    fn activate_skips_sliders_and_flips_toggles() {
        let mut effect = create(EffectKind::Orb);
        let controls = effect.controls();
        let mut dock = Dock::new();
        assert!(dock.activate(effect.as_mut()).unwrap().is_none());
        let toggle_index = controls
            .iter()
            .position(|control| matches!(control.kind, ControlKind::Toggle))
            .unwrap();
        for _ in 0..toggle_index {
            dock.select_next(&controls);
        }
        let change = dock.activate(effect.as_mut()).unwrap().unwrap();
        assert_eq!(change.value, controls[toggle_index].nudge(1));
    }
}
