mod fps;
mod overlay;
