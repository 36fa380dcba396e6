use std::collections::VecDeque;

use glam::Vec2;

/// Builds triangles over a set of tagged points.
///
/// Groups use this to derive elastic triads. Triangles are reported by the
/// tags given to [`Triangulator::add_generator`].
pub trait Triangulator {
    /// Forget all generators and the last diagram.
    fn clear(&mut self);

    fn add_generator(&mut self, center: Vec2, tag: usize);

    /// Build the diagram. `radius` is the cell size of the sampling grid.
    fn generate(&mut self, radius: f32);

    fn for_each_triangle(&self, callback: &mut dyn FnMut(usize, usize, usize));
}

struct Generator {
    /// Position in grid units once `generate` has run.
    center: Vec2,
    tag: usize,
}

struct Task {
    x: usize,
    y: usize,
    cell: usize,
    generator: usize,
}

/// Discrete Voronoi diagram on a uniform grid.
///
/// Every grid cell is owned by the nearest generator: a multi-source flood
/// fill seeds ownership, then owners are exchanged across cell borders
/// until no cell changes. Three distinct owners meeting at a 2x2 block of
/// cells form a triangle.
#[derive(Default)]
pub struct VoronoiDiagram {
    generators: Vec<Generator>,
    count_x: usize,
    count_y: usize,
    /// Owning generator per cell, row-major.
    diagram: Vec<Option<usize>>,
}

impl VoronoiDiagram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generator_count(&self) -> usize {
        self.generators.len()
    }

    fn push_neighbours(&self, queue: &mut VecDeque<Task>, x: usize, y: usize, cell: usize, generator: usize) {
        if x > 0 {
            queue.push_back(Task { x: x - 1, y, cell: cell - 1, generator });
        }
        if y > 0 {
            queue.push_back(Task { x, y: y - 1, cell: cell - self.count_x, generator });
        }
        if x + 1 < self.count_x {
            queue.push_back(Task { x: x + 1, y, cell: cell + 1, generator });
        }
        if y + 1 < self.count_y {
            queue.push_back(Task { x, y: y + 1, cell: cell + self.count_x, generator });
        }
    }
}

impl Triangulator for VoronoiDiagram {
    fn clear(&mut self) {
        self.generators.clear();
        self.diagram.clear();
        self.count_x = 0;
        self.count_y = 0;
    }

    fn add_generator(&mut self, center: Vec2, tag: usize) {
        self.generators.push(Generator { center, tag });
    }

    fn generate(&mut self, radius: f32) {
        self.diagram.clear();
        if self.generators.is_empty() {
            self.count_x = 0;
            self.count_y = 0;
            return;
        }
        let inverse_radius = 1.0 / radius;
        let mut lower = Vec2::splat(f32::MAX);
        let mut upper = Vec2::splat(-f32::MAX);
        for g in &self.generators {
            lower = lower.min(g.center);
            upper = upper.max(g.center);
        }
        self.count_x = 1 + (inverse_radius * (upper.x - lower.x)) as usize;
        self.count_y = 1 + (inverse_radius * (upper.y - lower.y)) as usize;
        self.diagram = vec![None; self.count_x * self.count_y];

        let mut queue = VecDeque::with_capacity(self.count_x * self.count_y);
        for (k, g) in self.generators.iter_mut().enumerate() {
            g.center = inverse_radius * (g.center - lower);
            let x = (g.center.x as usize).min(self.count_x - 1);
            let y = (g.center.y as usize).min(self.count_y - 1);
            queue.push_back(Task {
                x,
                y,
                cell: x + y * self.count_x,
                generator: k,
            });
        }
        while let Some(task) = queue.pop_front() {
            if self.diagram[task.cell].is_none() {
                self.diagram[task.cell] = Some(task.generator);
                self.push_neighbours(&mut queue, task.x, task.y, task.cell, task.generator);
            }
        }

        let max_iteration = self.count_x + self.count_y;
        for _ in 0..max_iteration {
            for y in 0..self.count_y {
                for x in 0..self.count_x - 1 {
                    let i = x + y * self.count_x;
                    if let (Some(a), Some(b)) = (self.diagram[i], self.diagram[i + 1]) {
                        if a != b {
                            queue.push_back(Task { x, y, cell: i, generator: b });
                            queue.push_back(Task { x: x + 1, y, cell: i + 1, generator: a });
                        }
                    }
                }
            }
            for y in 0..self.count_y - 1 {
                for x in 0..self.count_x {
                    let i = x + y * self.count_x;
                    if let (Some(a), Some(b)) = (self.diagram[i], self.diagram[i + self.count_x]) {
                        if a != b {
                            queue.push_back(Task { x, y, cell: i, generator: b });
                            queue.push_back(Task { x, y: y + 1, cell: i + self.count_x, generator: a });
                        }
                    }
                }
            }
            let mut updated = false;
            while let Some(task) = queue.pop_front() {
                let Some(current) = self.diagram[task.cell] else {
                    continue;
                };
                if current == task.generator {
                    continue;
                }
                let cell = Vec2::new(task.x as f32, task.y as f32);
                let a2 = (self.generators[current].center - cell).length_squared();
                let b2 = (self.generators[task.generator].center - cell).length_squared();
                if a2 > b2 {
                    self.diagram[task.cell] = Some(task.generator);
                    self.push_neighbours(&mut queue, task.x, task.y, task.cell, task.generator);
                    updated = true;
                }
            }
            if !updated {
                break;
            }
        }
    }

    fn for_each_triangle(&self, callback: &mut dyn FnMut(usize, usize, usize)) {
        if self.count_x < 2 || self.count_y < 2 {
            return;
        }
        for y in 0..self.count_y - 1 {
            for x in 0..self.count_x - 1 {
                let i = x + y * self.count_x;
                let (Some(a), Some(b), Some(c), Some(d)) = (
                    self.diagram[i],
                    self.diagram[i + 1],
                    self.diagram[i + self.count_x],
                    self.diagram[i + 1 + self.count_x],
                ) else {
                    continue;
                };
                if b != c {
                    if a != b && a != c {
                        callback(self.generators[a].tag, self.generators[b].tag, self.generators[c].tag);
                    }
                    if d != b && d != c {
                        callback(self.generators[b].tag, self.generators[d].tag, self.generators[c].tag);
                    }
                }
            }
        }
    }
}
