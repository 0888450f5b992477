use std::collections::VecDeque;

/// # Summary
/// 固定容量的尾随窗口。
///
/// # Invariants
/// - 最多保留最近 `capacity` 个值，按插入顺序排列，最旧的在前。
/// - 只有窗口填满时才对外暴露内容，窗口不足即视为统计量缺失。
#[derive(Debug, Clone)]
pub struct TrailingWindow<T> {
    values: VecDeque<T>,
    capacity: usize,
}

impl<T: Copy> TrailingWindow<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            values: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// 追加新值；已满时先淘汰最旧的值。
    pub fn push(&mut self, item: T) {
        if self.capacity == 0 {
            return;
        }
        if self.values.len() == self.capacity {
            self.values.pop_front();
        }
        self.values.push_back(item);
    }

    /// 窗口已满时返回其内容，否则返回 None。
    pub fn full_values(&self) -> Option<Vec<T>> {
        (self.capacity > 0 && self.values.len() == self.capacity)
            .then(|| self.values.iter().copied().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_keeps_latest_in_order() {
        let mut window = TrailingWindow::new(3);
        window.push(1);
        window.push(2);
        assert_eq!(window.full_values(), None);

        window.push(3);
        assert_eq!(window.full_values(), Some(vec![1, 2, 3]));
        window.push(4);
        window.push(5);
        assert_eq!(window.full_values(), Some(vec![3, 4, 5]));
    }

    #[test]
    fn test_zero_capacity_never_full() {
        let mut window = TrailingWindow::new(0);
        window.push(1.0);
        assert_eq!(window.full_values(), None);
    }
}
