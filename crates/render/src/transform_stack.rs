use glam::Mat4;

/// Hierarchical transform stack.
///
/// The application root seeds the stack with the screen projection; subtree
/// traversal may push/pop parent transforms on top. Draw paths flatten the
/// whole stack into the single matrix uploaded to the shader.
#[derive(Debug, Clone, Default)]
pub struct TransformStack {
    stack: Vec<Mat4>,
}

impl TransformStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a stack pre-seeded with a root transform.
    pub fn with_root(root: Mat4) -> Self {
        Self { stack: vec![root] }
    }

    pub fn push(&mut self, m: Mat4) {
        self.stack.push(m);
    }

    pub fn pop(&mut self) -> Option<Mat4> {
        self.stack.pop()
    }

    /// Product of all entries, outermost first. Identity when empty.
    pub fn flatten(&self) -> Mat4 {
        self.stack
            .iter()
            .fold(Mat4::IDENTITY, |acc, m| acc * *m)
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn clear(&mut self) {
        self.stack.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec3, Vec4};

    #[test]
    fn empty_flattens_to_identity() {
        let stack = TransformStack::new();
        assert_eq!(stack.flatten(), Mat4::IDENTITY);
    }

    #[test]
    fn identity_pushes_do_not_change_result() {
        let root = Mat4::from_translation(Vec3::new(3.0, 0.0, 0.0));
        let mut stack = TransformStack::with_root(root);
        stack.push(Mat4::IDENTITY);
        stack.push(Mat4::IDENTITY);
        assert_eq!(stack.flatten(), root);
    }

    #[test]
    fn flatten_applies_outermost_first() {
        let mut stack = TransformStack::new();
        stack.push(Mat4::from_translation(Vec3::new(10.0, 0.0, 0.0)));
        stack.push(Mat4::from_scale(Vec3::splat(2.0)));

        // Scale happens in the child frame, translation in the parent frame.
        let p = stack.flatten() * Vec4::new(1.0, 0.0, 0.0, 1.0);
        assert_eq!(p, Vec4::new(12.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn push_pop_restores_depth() {
        let mut stack = TransformStack::with_root(Mat4::IDENTITY);
        stack.push(Mat4::from_scale(Vec3::splat(2.0)));
        assert_eq!(stack.len(), 2);
        stack.pop();
        assert_eq!(stack.len(), 1);
    }
}
