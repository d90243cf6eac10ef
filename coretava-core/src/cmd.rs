/// Ordered batch of effect requests returned from `update`.
///
/// The runtime dispatches requests in the order they were pushed, which is
/// what lets a teardown release an observation before the unit stops.
pub struct CoreCmd<Req>(Vec<Req>);

impl<Req> CoreCmd<Req> {
    pub fn none() -> Self {
        CoreCmd(Vec::new())
    }

    pub fn single(req: Req) -> Self {
        CoreCmd(vec![req])
    }

    /// Concatenate several batches, preserving order.
    pub fn batch(cmds: impl IntoIterator<Item = CoreCmd<Req>>) -> Self {
        let mut all = Vec::new();
        for CoreCmd(mut v) in cmds {
            all.append(&mut v);
        }
        CoreCmd(all)
    }

    pub fn push(&mut self, req: Req) {
        self.0.push(req);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Req> {
        self.0.iter()
    }

    pub fn into_inner(self) -> Vec<Req> {
        self.0
    }
}
