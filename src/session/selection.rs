/*!
 * Line selection and the feedback attached to it.
 *
 * Feedback only exists inside `Selection::Selected`, so any change of selection
 * necessarily drops whatever feedback was typed for the previous line.
 */

/// Which script line, if any, the user is refining
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    None,
    Selected {
        index: usize,
        feedback: String,
    },
}

impl Selection {
    /// Click on a line: the selected line deselects, any other line becomes the
    /// selection with empty feedback.
    pub fn toggle(&mut self, index: usize) {
        let next = match &*self {
            Self::Selected { index: current, .. } if *current == index => Self::None,
            _ => Self::Selected {
                index,
                feedback: String::new(),
            },
        };
        *self = next;
    }

    /// Store feedback for the selected line. Ignored when nothing is selected.
    pub fn set_feedback(&mut self, text: impl Into<String>) -> bool {
        match self {
            Self::Selected { feedback, .. } => {
                *feedback = text.into();
                true
            }
            Self::None => false,
        }
    }

    pub fn clear(&mut self) {
        *self = Self::None;
    }

    /// Index of the selected line
    pub fn index(&self) -> Option<usize> {
        match self {
            Self::Selected { index, .. } => Some(*index),
            Self::None => None,
        }
    }

    /// Feedback for the selected line; empty when nothing is selected
    pub fn feedback(&self) -> &str {
        match self {
            Self::Selected { feedback, .. } => feedback,
            Self::None => "",
        }
    }

    pub fn is_selected(&self, index: usize) -> bool {
        self.index() == Some(index)
    }

    /// Selected index and feedback, if the feedback is ready to send
    pub fn ready_for_refine(&self) -> Option<(usize, &str)> {
        match self {
            Self::Selected { index, feedback } if !feedback.trim().is_empty() => Some((*index, feedback)),
            _ => None,
        }
    }
}
