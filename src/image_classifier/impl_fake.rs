use crate::image_classifier::interface::ImageClassifier;
use crate::image_classifier::preprocess::ImageTensor;
use crate::inference::decision::softmax;
use std::sync::atomic::{AtomicUsize, Ordering};

enum Behaviour {
    Fixed(Vec<f32>),
    Brightness(usize),
    Fail(String),
    Panic,
}

pub struct ImageClassifierFake {
    behaviour: Behaviour,
    calls: AtomicUsize,
}

impl ImageClassifierFake {
    pub fn fixed(probabilities: Vec<f32>) -> Self {
        Self::with(Behaviour::Fixed(probabilities))
    }

    /// Softmax over the distance between the image's mean intensity and
    /// `classes` evenly spaced anchors, so different images get different
    /// answers.
    pub fn brightness(classes: usize) -> Self {
        Self::with(Behaviour::Brightness(classes))
    }

    pub fn failing(message: &str) -> Self {
        Self::with(Behaviour::Fail(message.to_string()))
    }

    pub fn panicking() -> Self {
        Self::with(Behaviour::Panic)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn with(behaviour: Behaviour) -> Self {
        Self {
            behaviour,
            calls: AtomicUsize::new(0),
        }
    }
}

impl ImageClassifier for ImageClassifierFake {
    fn forward(
        &self,
        input: &ImageTensor,
    ) -> Result<Vec<f32>, Box<dyn std::error::Error + Send + Sync>> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        match &self.behaviour {
            Behaviour::Fixed(probabilities) => Ok(probabilities.clone()),
            Behaviour::Brightness(classes) => {
                let classes = (*classes).max(1);
                let mean = input.mean();
                let logits: Vec<f32> = (0..classes)
                    .map(|i| {
                        let anchor = (i as f32 + 0.5) / classes as f32;
                        -((mean - anchor).abs() * 10.0)
                    })
                    .collect();
                Ok(softmax(&logits))
            }
            Behaviour::Fail(message) => Err(message.clone().into()),
            Behaviour::Panic => panic!("fake classifier panicked"),
        }
    }
}
